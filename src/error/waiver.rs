use thiserror::Error;

#[derive(Error, Debug)]
pub enum WaiverError {
    /// Designation query matched no player in the current snapshot.
    #[error("No player found with name: {0}")]
    PlayerNotFound(String),

    /// Players matched but none are on a team the requesting user owns.
    #[error("Found {matches} player(s) matching {query:?}, but none belong to a team owned by {username}")]
    NotOwned {
        query: String,
        username: String,
        matches: usize,
    },

    /// No stored claim originated from this message.
    #[error("Waiver claim with message ID {0} not found")]
    ClaimNotFound(String),
}
