//! Card number issuance.
//!
//! Real PAN issuance (BIN ranges, Luhn check digits) belongs to an external
//! system; the ledger only requires a collaborator that can hand out a
//! 16-digit numeric string.

/// Issues primary account numbers for new cards.
pub trait PanGenerator: Send + Sync {
    /// Produce a 16-digit numeric PAN.
    fn generate_pan(&self) -> String;
}

/// Placeholder issuance drawing digits from random UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPanGenerator;

impl PanGenerator for RandomPanGenerator {
    fn generate_pan(&self) -> String {
        let mut digits = String::with_capacity(16);
        // A single UUID may not contain 16 digit characters; keep drawing.
        while digits.len() < 16 {
            let raw = uuid::Uuid::new_v4().simple().to_string();
            digits.extend(
                raw.chars()
                    .filter(char::is_ascii_digit)
                    .take(16 - digits.len()),
            );
        }
        digits
    }
}
