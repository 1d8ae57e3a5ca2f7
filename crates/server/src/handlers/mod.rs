//! HTTP request handlers.

pub mod apks;
pub mod common;
pub mod corrs;

pub use apks::{
    create_apk, delete_apk, get_apk, get_apk_by_name, list_apks, simple_apks, update_apk,
};
pub use common::{health_check, serve_index};
pub use corrs::{
    create_corr, delete_corr, get_corr, get_corr_by_bundle, list_corrs, update_corr,
};
