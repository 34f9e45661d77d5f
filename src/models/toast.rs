use serde::{ Serialize, Deserialize };

pub const DEFAULT_TIMEOUT_MS: u64 = 4000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    Success,
    Error,
    #[default]
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToastItem {
    pub id: String,
    pub message: String,
    pub variant: ToastVariant,
    pub timeout_ms: u64,
}

/// Per-push overrides. Unset fields take the store defaults.
#[derive(Clone, Copy, Debug, Default)]
pub struct ToastOptions {
    pub variant: Option<ToastVariant>,
    pub timeout_ms: Option<u64>,
}

impl ToastOptions {
    pub fn variant(mut self, variant: ToastVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}
