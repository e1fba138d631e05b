use uuid::Uuid;

use crate::utils::error::BrokerError;

/// Separator used to compose session ids from their components.
pub const DELIMITER: char = '_';

pub type SessionId = String;

/// Checks that a client or topic value is usable inside a session id.
///
/// Session ids are decomposed by splitting on [`DELIMITER`], so a value
/// containing it would corrupt routing. Violation is a caller error.
pub fn validate_token(value: &str) -> Result<(), BrokerError> {
    if value.contains(DELIMITER) {
        return Err(BrokerError::InvalidArgument(value.to_string()));
    }
    Ok(())
}

/// Composes a fresh session id of the form `<client>_<topic>_<nonce>`.
///
/// The nonce is a v4 UUID, so two calls never produce the same id.
/// Callers must validate `client` and `topic` first.
pub fn compose(client: &str, topic: &str) -> SessionId {
    format!("{client}{DELIMITER}{topic}{DELIMITER}{}", Uuid::new_v4())
}

/// Extracts the routing topic from an outbound message.
///
/// Every broadcast message starts with the sender's session id, so the
/// second delimiter-separated field is the topic. Any delimiter appearing
/// later in the payload lands in the third field and beyond, leaving the
/// topic field intact. Returns `None` for messages without enough fields.
pub fn routing_topic(message: &str) -> Option<&str> {
    message.split(DELIMITER).nth(1)
}
