//! Request payloads and the explicit validation run before any store call.

pub mod category;
pub mod product;
pub mod validation;

pub use category::{CategoryPayload, NewCategory};
pub use product::{NewProduct, ProductPayload};
pub use validation::{FieldError, ValidationErrors};
