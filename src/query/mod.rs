//! Query Module
//!
//! Matches JSON documents against filter expressions.
//!
//! ## Filter Language
//! ```text
//! {}                                     every document
//! {"name": "Bob"}                        implicit equality
//! {"age": {"$gt": 26, "$lt": 40}}        operators, AND-combined
//! {"email": {"$like": "%gmail.com"}}     SQL wildcards (% and _)
//! {"city": {"$in": ["Paris", "Berlin"]}} membership
//! {"$or": [{"age": 25}, {"name": "Bob"}]}
//! ```
//!
//! ## Responsibilities
//! - Pure evaluation (`evaluate`): no I/O, never fails, unknown shapes
//!   simply do not match
//! - Boundary validation (`validate`): rejects filters a client most likely
//!   got wrong before they silently match nothing
//! - A total order over values for `$gt` / `$lt` / equality

mod evaluator;
mod ordering;
mod validate;
mod wildcard;

pub use evaluator::{evaluate, evaluate_field, evaluate_fields, Operator, OR_KEY};
pub use ordering::{compare_values, values_equal};
pub use validate::validate;
pub use wildcard::like;
