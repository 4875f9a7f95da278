//! Permission bitflags for feed-channel access control
//!
//! Only the capabilities that decide whether a bump can land in a channel are
//! modelled; platform bindings translate their native bitfields into these.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Channel-level permission flags
    ///
    /// Stored as a 64-bit integer, serialized as string in JSON for
    /// JavaScript safety.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        /// View channel and read messages
        const VIEW_CHANNEL         = 1 << 0;
        /// Send messages in text channels
        const SEND_MESSAGES        = 1 << 1;
        /// Read past messages in the channel
        const READ_MESSAGE_HISTORY = 1 << 2;
        /// Render rich embeds for posted links
        const EMBED_LINKS          = 1 << 3;
        /// Use emojis from other guilds
        const USE_EXTERNAL_EMOJIS  = 1 << 4;
        /// Bypass all permission checks
        const ADMINISTRATOR        = 1 << 5;

        /// Everything the bot needs in a feed channel to deliver a bump
        const FEED_DELIVERY = Self::VIEW_CHANNEL.bits()
            | Self::SEND_MESSAGES.bits()
            | Self::EMBED_LINKS.bits()
            | Self::USE_EXTERNAL_EMOJIS.bits();

        /// What the @everyone role must retain for a feed channel to count
        /// as publicly readable
        const EVERYONE_BASELINE = Self::VIEW_CHANNEL.bits()
            | Self::READ_MESSAGE_HISTORY.bits();
    }
}

impl Permissions {
    /// Check if the permission set contains a required permission
    ///
    /// Administrators bypass all permission checks.
    #[inline]
    pub fn has(&self, permission: Permissions) -> bool {
        if self.contains(Permissions::ADMINISTRATOR) {
            return true;
        }
        self.contains(permission)
    }

    /// Check if the permission set has all of the given permissions
    #[inline]
    pub fn has_all(&self, permissions: Permissions) -> bool {
        if self.contains(Permissions::ADMINISTRATOR) {
            return true;
        }
        self.contains(permissions)
    }

    /// The subset of `required` this permission set lacks
    ///
    /// Empty for administrators regardless of the raw bits.
    pub fn missing(&self, required: Permissions) -> Permissions {
        if self.contains(Permissions::ADMINISTRATOR) {
            return Permissions::empty();
        }
        required - *self
    }

    /// Get the raw bits as i64 (for storage)
    #[inline]
    pub fn to_i64(self) -> i64 {
        self.bits() as i64
    }

    /// Create from raw i64 bits
    #[inline]
    pub fn from_i64(bits: i64) -> Self {
        Permissions::from_bits_truncate(bits as u64)
    }

    /// Parse from string representation (decimal number)
    pub fn parse(s: &str) -> Result<Self, std::num::ParseIntError> {
        s.parse::<u64>().map(Permissions::from_bits_truncate)
    }

    /// Get a list of all individual permissions that are set
    pub fn list(&self) -> Vec<&'static str> {
        let mut result = Vec::new();
        if self.contains(Self::VIEW_CHANNEL) {
            result.push("VIEW_CHANNEL");
        }
        if self.contains(Self::SEND_MESSAGES) {
            result.push("SEND_MESSAGES");
        }
        if self.contains(Self::READ_MESSAGE_HISTORY) {
            result.push("READ_MESSAGE_HISTORY");
        }
        if self.contains(Self::EMBED_LINKS) {
            result.push("EMBED_LINKS");
        }
        if self.contains(Self::USE_EXTERNAL_EMOJIS) {
            result.push("USE_EXTERNAL_EMOJIS");
        }
        if self.contains(Self::ADMINISTRATOR) {
            result.push("ADMINISTRATOR");
        }
        result
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions::empty()
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

// Serialize as string for JSON (JavaScript BigInt safety)
impl Serialize for Permissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.bits().to_string())
    }
}

// Deserialize from string or number
impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct PermissionsVisitor;

        impl Visitor<'_> for PermissionsVisitor {
            type Value = Permissions;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer representing permission bits")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Ok(Permissions::from_bits_truncate(value as u64))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Ok(Permissions::from_bits_truncate(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                value
                    .parse::<u64>()
                    .map(Permissions::from_bits_truncate)
                    .map_err(|_| de::Error::custom("invalid permissions string"))
            }
        }

        deserializer.deserialize_any(PermissionsVisitor)
    }
}

impl From<i64> for Permissions {
    fn from(bits: i64) -> Self {
        Permissions::from_bits_truncate(bits as u64)
    }
}

impl From<u64> for Permissions {
    fn from(bits: u64) -> Self {
        Permissions::from_bits_truncate(bits)
    }
}

impl From<Permissions> for i64 {
    fn from(perms: Permissions) -> Self {
        perms.bits() as i64
    }
}

impl From<Permissions> for u64 {
    fn from(perms: Permissions) -> Self {
        perms.bits()
    }
}
