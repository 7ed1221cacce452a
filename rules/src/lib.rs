//! Components B and C: the Type-Mapping Registry and the Name/Expression
//! Rule Store, both sourced from the same optional JSON rules file.

pub mod expression_store;
pub mod name_store;
pub mod rulefile;
pub mod type_registry;

use common::config::SourceFlavor;
use common::err::CdcError;

pub use expression_store::TransformExpressionMap;
pub use name_store::{ObjectKind, ObjectNameMap};
pub use rulefile::{load_rule_file, RuleFile};
pub use type_registry::{TypeMapping, TypeMappingRegistry};

/// The three rule components a connector needs, built once at startup
/// from its source flavor and (optionally) a shared rules file.
pub struct RuleSet {
    pub types: TypeMappingRegistry,
    pub names: ObjectNameMap,
    pub expressions: TransformExpressionMap,
}

impl RuleSet {
    pub fn load(flavor: SourceFlavor, rules_file: Option<&str>) -> Result<Self, CdcError> {
        let file = match rules_file {
            Some(path) => Some(load_rule_file(path)?),
            None => None,
        };
        Ok(Self {
            types: TypeMappingRegistry::new(flavor, file.as_ref()),
            names: ObjectNameMap::new(file.as_ref()),
            expressions: TransformExpressionMap::new(file.as_ref()),
        })
    }

    /// A rule set with only the compiled-in type defaults and no name or
    /// expression overrides, for connectors that carry no rules file.
    pub fn defaults_only(flavor: SourceFlavor) -> Self {
        Self {
            types: TypeMappingRegistry::new(flavor, None),
            names: ObjectNameMap::new(None),
            expressions: TransformExpressionMap::new(None),
        }
    }
}
