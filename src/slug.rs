use uuid::Uuid;

/// slugify
///
/// Lower-cases the input and replaces every character outside `[a-z0-9]` with `-`.
/// The output alphabet is `[a-z0-9-]`, so applying it twice is a no-op.
pub fn slugify(input: &str) -> String {
    input
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// song_location
///
/// The human-readable site path of a song, e.g. `("Florida", "Starfucker")`
/// becomes `/songs/florida-starfucker`.
pub fn song_location(title: &str, artist: &str) -> String {
    format!("/songs/{}", slugify(&format!("{}-{}", title, artist)))
}

/// The API path under which a stored song is addressable.
pub fn song_api_location(id: Uuid) -> String {
    format!("/api/songs/{}", id)
}
