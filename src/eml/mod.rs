//! Typed models of EML elements.
//!
//! Each element type is a [`Node`] parameterized by a [`Schema`]: the
//! attributes it understands, the children it manages and the order
//! those children are written in. A node parses its attributes from a
//! DOM fragment, keeps a copy of that fragment, and writes its current
//! attributes back over the copy. Children the schema does not manage
//! pass through untouched.
//!
//! ```
//! use eml_document::eml::{EmlTemporalCoverage, TemporalCoverage};
//!
//! let mut coverage = EmlTemporalCoverage::new(TemporalCoverage::single("2020"));
//! assert!(coverage.is_valid());
//! assert_eq!(
//!     coverage.serialize(),
//!     "<temporalCoverage><singleDateTime><calendarDate>2020</calendarDate></singleDateTime></temporalCoverage>",
//! );
//! ```

pub mod change;
pub mod error;
pub mod extract;
pub mod names;
pub mod node;

pub mod distribution;
pub mod geo_coverage;
pub mod keyword_set;
pub mod methods;
pub mod missing_value_code;
pub mod other_entity;
pub mod project;
pub mod taxon_coverage;
pub mod temporal_coverage;
pub mod text;

pub use self::change::{ChangeFlag, Lineage, NodeKind, Notifier};
pub use self::error::{Error, SchemaError, ValidationErrors};
pub use self::names::NodeNameMap;
pub use self::node::{rewrite, update_doms, verify, verify_sample, Node, NodeState, ParseContext, Schema, Slot};

pub use self::distribution::{Distribution, DistributionField, Distributions, EmlDistribution};
pub use self::geo_coverage::{EmlGeoCoverage, GeoCoverage};
pub use self::keyword_set::{EmlKeywordSet, KeywordSet};
pub use self::methods::{EmlMethodStep, EmlMethods, MethodStep, Methods};
pub use self::missing_value_code::{EmlMissingValueCode, MissingValueCode};
pub use self::other_entity::{EmlOtherEntity, OtherEntity, PhysicalSummary};
pub use self::project::{Award, EmlAward, EmlProject, Project};
pub use self::taxon_coverage::{EmlTaxonCoverage, TaxonCoverage, TaxonId, TaxonomicClassification};
pub use self::temporal_coverage::{EmlTemporalCoverage, TemporalCoverage};
pub use self::text::{EmlText, TextType};
