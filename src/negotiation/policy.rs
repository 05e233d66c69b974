//! Rules for accepting a probe response.

/// Decides whether the bytes read after the probe command count as a
/// responsive device.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResponsePolicy {
    /// Any completed read, including one that returned zero bytes.
    AnyResponse,
    /// At least one byte must arrive.
    #[default]
    RequireBytes,
    /// The response must contain one of these byte patterns.
    Contains(Vec<Vec<u8>>),
}

impl ResponsePolicy {
    /// Typical AT replies: `OK`, lower-case `ok`, or the command echoed back.
    pub fn at_ok() -> Self {
        Self::Contains(vec![b"OK".to_vec(), b"ok".to_vec(), b"AT".to_vec()])
    }

    /// Check whether `response` is accepted.
    pub fn accepts(&self, response: &[u8]) -> bool {
        match self {
            Self::AnyResponse => true,
            Self::RequireBytes => !response.is_empty(),
            Self::Contains(patterns) => patterns.iter().any(|expected| {
                !expected.is_empty()
                    && response.len() >= expected.len()
                    && response
                        .windows(expected.len())
                        .any(|window| window == expected.as_slice())
            }),
        }
    }
}
