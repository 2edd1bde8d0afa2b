//! Domain types and models

pub mod enums;
pub mod request;
pub mod resources;
pub mod token;

pub use enums::{
    CouponType, FeedbackEvent, PaymentMethodType, RiskAssessment, TransactionAddressType,
    TransactionType,
};
pub use request::{Method, RequestDescriptor};
pub use resources::{
    AccountSearchResponse, AssessmentResponse, FeedbackQueryParams, Reason,
    RegisterFeedbackProps, RegisterLoginProps, RegisterPaymentProps, RegisterSignupProps,
    RegisterWebLoginProps, RegisterWebSignupProps, SearchAccountsProps,
};
pub use token::{ClientIdentity, Credential, TokenGrant};
