//! Masking operators and the pipeline that chains them.
//!
//! - **`policy`**: how characters are hidden (`KeepConfig`)
//! - **`operator`**: what gets hidden, one shape per operator (`MaskingOperator`)
//! - **`pipeline`**: which properties get masked (`MaskingPipeline`)

mod operator;
mod pipeline;
mod policy;

pub use operator::{
    CreditCardMaskingOperator, EmailMaskingOperator, IbanMaskingOperator, MaskingOperator,
    WrappedOperator,
};
pub use pipeline::MaskingPipeline;
pub use policy::{KeepConfig, MASK_CHAR};
