//! Policy evaluation using CEL
//!
//! The decision logic for registration events lives in an externally
//! authored policy document, not in this codebase. This module owns the
//! only contract the pipeline needs from the engine:
//! `evaluate(document, query, input) -> output | error`.
//!
//! # Implementation Model
//!
//! A [`PolicyDocument`] is a CEL (Common Expression Language) program,
//! read from disk and compiled once at startup, then shared read-only
//! across invocations. The program evaluates to a map of named results;
//! a **query path** (dot-separated segments, e.g. `presignup.result`)
//! addresses the result for one handler type, so a single document can
//! serve several handlers.
//!
//! [`evaluate`] binds the caller's input under the `input` variable plus a
//! `now` timestamp, executes the program, walks the query path, and
//! deserializes whatever the policy produced into the caller's output
//! type. No CEL semantics leak past this module; swapping the engine means
//! reimplementing these two files and nothing else.
//!
//! Compile errors, execution errors, unresolvable query paths, and
//! malformed outputs are all infrastructure errors, distinct from any
//! decision the policy itself expresses.

mod document;
mod evaluator;

pub use document::PolicyDocument;
pub use evaluator::evaluate;
