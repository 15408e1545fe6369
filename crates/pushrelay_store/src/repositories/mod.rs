//! Repository modules for token persistence

pub mod device_token;

pub use device_token::{
    check_key_segment, detailed_key, detailed_ttl, detailed_user_prefix, simple_key, TokenStore,
    DETAILED_FALLBACK_TTL,
};
