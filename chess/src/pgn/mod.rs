pub mod headers;
pub mod movetext;
pub mod parser;
pub mod san;
pub mod writer;

pub use headers::{parse_elo, parse_header_line, GameHeaders, SEVEN_TAG_ROSTER};
pub use movetext::{classify, tokenize, GameResult, MovetextToken};
pub use parser::{parse_pgn, read_pgn_file, split_games, ParsedPgn, PgnError, RawGame, SplitOutput};
pub use san::{format_san, parse_san, SanError};
pub use writer::{to_pgn_collection, to_pgn_text};
