use std::path::PathBuf;

use clap::Parser;

/// Write an RSS feed of the wishlist books your library has on the shelf.
///
/// Settings come from the environment (or a `.env` file): WISHLIST_USER_ID
/// and WISHLIST_KEY are required.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// File to write the feed to (default: stdout).
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_optional() {
        let cli = Cli::try_parse_from(["wishlist-to-library"]).unwrap();
        assert!(cli.output.is_none());

        let cli = Cli::try_parse_from(["wishlist-to-library", "feed.xml"]).unwrap();
        assert_eq!(cli.output, Some(PathBuf::from("feed.xml")));
    }

    #[test]
    fn rejects_extra_arguments() {
        assert!(Cli::try_parse_from(["wishlist-to-library", "a.xml", "b.xml"]).is_err());
        assert!(Cli::try_parse_from(["wishlist-to-library", "--pretty"]).is_err());
    }
}
