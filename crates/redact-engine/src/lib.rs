//! Validation and apply stages of redact
//!
//! Raw candidates (from detection or a hand-edited table) are validated into
//! a [`CandidateDocument`](redact_core::CandidateDocument) with tokens
//! assigned, then applied to a possibly edited text with a report of what
//! changed.

pub mod apply;
pub mod files;
pub mod io;
pub mod table;
pub mod validate;

pub use apply::{ALIGN_WINDOW, align_slice, apply_to_text};
pub use files::{apply_file, detect_file, validate_file};
pub use io::{
    check_encoding, export_csv, export_raw_csv, load_candidate_document, load_raw_candidates,
    parse_raw_candidates, read_text, save_json_pretty, write_text,
};
pub use table::{read_candidates_csv, write_candidates_csv, write_raw_csv};
pub use validate::{
    build_candidates_document, coerce_bool, default_apply, token_key, validate_candidate,
};
