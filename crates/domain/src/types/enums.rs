//! Enum catalogs shared with the API, serialized in snake_case

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Login,
    Payment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionAddressType {
    Shipping,
    Billing,
    Home,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponType {
    FixedValue,
    PercentOff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodType {
    ApplePay,
    AccountBalance,
    CreditCard,
    DebitCard,
    GooglePay,
    MealVoucher,
    NuPay,
    Pix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackEvent {
    AccountAllowed,
    AccountTakeover,
    Chargeback,
    ChargebackNotification,
    DeviceAllowed,
    IdentityFraud,
    LoginAccepted,
    LoginAcceptedByDeviceVerification,
    LoginAcceptedByFacialBiometrics,
    LoginAcceptedByManualReview,
    LoginDeclined,
    LoginDeclinedByFacialBiometrics,
    LoginDeclinedByManualReview,
    PaymentAccepted,
    PaymentAcceptedByControlGroup,
    PaymentAcceptedByThirdParty,
    PaymentDeclined,
    PaymentDeclinedByAcquirer,
    PaymentDeclinedByBusiness,
    PaymentDeclinedByManualReview,
    PaymentDeclinedByRiskAnalysis,
    PromotionAbuse,
    Reset,
    SignupAccepted,
    SignupDeclined,
    Verified,
}

/// Risk verdict attached to assessments
///
/// Values added server-side after this release decode as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskAssessment {
    LowRisk,
    HighRisk,
    UnknownRisk,
    #[serde(other)]
    Unknown,
}
