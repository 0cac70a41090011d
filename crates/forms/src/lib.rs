//! `lsp-forms`: the APL01 (personal data) and APL02 (self-evaluation)
//! intake forms.
//!
//! Both forms hang off one assessment. Creation and merge-patch rules live
//! here; ownership checks happen in the services that load the assessment.

pub mod apl01;
pub mod apl02;

pub use apl01::{Apl01Fields, FormApl01, NewApl01};
pub use apl02::{Apl02Patch, Apl02Status, FormApl02, NewApl02};
