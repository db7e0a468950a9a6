//! Field validation for message payloads.
//!
//! Identity-registration rules live here, along with the small length
//! checks the other message kinds share. Every check is pure; the first
//! failing check determines the error, so all nodes reject a bad message
//! with the same error.

use crate::error::ValidationError;
use crate::msg::username::IssueTokenMsg;

/// Shortest accepted identity token id.
pub const USERNAME_ID_MIN_LEN: usize = 4;

/// Longest accepted identity token id.
pub const USERNAME_ID_MAX_LEN: usize = 64;

/// Punctuation allowed in an identity token id besides ASCII alphanumerics.
pub const USERNAME_ID_PUNCTUATION: &[u8] = b"+-,._@";

/// Check whether a single byte may appear in an identity token id.
pub fn is_username_id_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || USERNAME_ID_PUNCTUATION.contains(&b)
}

/// Validate an identity token id: length first, then character set.
///
/// Accepts email-like (`alice@example.com`), handle-like (`@iov_official`)
/// and phone-like (`+491234567890`) identifiers.
pub fn validate_username_id(field: &'static str, id: &[u8]) -> Result<(), ValidationError> {
    check_len(field, id.len(), USERNAME_ID_MIN_LEN, USERNAME_ID_MAX_LEN)?;

    if let Some(position) = id.iter().position(|b| !is_username_id_byte(*b)) {
        return Err(ValidationError::ForbiddenCharacter {
            field,
            byte: id[position],
            position,
        });
    }
    Ok(())
}

/// Validate a request to issue an identity token.
///
/// Order: owner present, owner well-formed, id length, id characters.
pub fn validate_issue_token(msg: &IssueTokenMsg) -> Result<(), ValidationError> {
    msg.owner.validate("owner")?;
    validate_username_id("id", &msg.id)
}

/// Validate an add- or remove-chain-address request.
///
/// Each field only has to be present; the checks run in field order.
pub fn validate_chain_address_mutation(
    id: &[u8],
    chain_id: &[u8],
    address: &[u8],
) -> Result<(), ValidationError> {
    require("id", id)?;
    require("chain_id", chain_id)?;
    require("address", address)?;
    Ok(())
}

/// Fail with `MissingField` if `value` is empty.
pub fn require(field: &'static str, value: &[u8]) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// Fail with `LengthOutOfRange` unless `min <= len <= max`.
pub fn check_len(
    field: &'static str,
    len: usize,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    if len < min || len > max {
        return Err(ValidationError::LengthOutOfRange {
            field,
            len,
            min,
            max,
        });
    }
    Ok(())
}

/// Fail with `LengthOutOfRange` if `len` exceeds `max`. Empty is allowed.
pub fn check_max_len(field: &'static str, len: usize, max: usize) -> Result<(), ValidationError> {
    check_len(field, len, 0, max)
}
