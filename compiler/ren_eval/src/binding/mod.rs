//! Binding: how words find their storage.
//!
//! - [`binder`]: symbol-to-index scratch map for one bind span
//! - [`bind`]: binding arrays to frames and parameter lists
//! - [`resolve`]: word + specifier to slot
//! - [`patch`]: virtual-binding chains (`let`, `use`, `for-each`)

pub mod bind;
pub mod binder;
pub mod patch;
pub mod resolve;

pub use bind::{
    bind, bind_relative, collect_set_words, copy_deep_derelativized, virtual_bind_new_context,
    BindOptions,
};
pub use binder::{live_binder_claims, AlreadyClaimed, Binder, OutstandingClaims};
pub use patch::{derive_specifier, make_frame_patch, make_local_patch, make_single_patch, merge};
pub use resolve::{derelativize, derelativize_cell, derives_from, resolve, ResolveError, Slot};
