const ARG_WS_URL: &str = "ws-url";
const ARG_MATCH_URL: &str = "match-url";
const ARG_PRICE: &str = "price";
const ARG_CONFIG: &str = "config";
const ARG_LOG_FILE: &str = "log-file";
const ARG_NO_LOG_FILE: &str = "no-log-file";

pub struct AppEnvironment {}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Args {
    pub ws_url: Option<String>,
    pub match_url: Option<String>,
    pub price: Option<String>,
    pub config: Option<String>,
    pub log_file: Option<String>,
    pub no_log_file: bool,
}

impl Args {
    pub fn parse(iterator: impl Iterator<Item = String>) -> Self {
        let vector: Vec<String> = iterator.collect();

        Self {
            ws_url: Self::value_by_flag(ARG_WS_URL, &vector),
            match_url: Self::value_by_flag(ARG_MATCH_URL, &vector),
            price: Self::value_by_flag(ARG_PRICE, &vector),
            config: Self::value_by_flag(ARG_CONFIG, &vector),
            log_file: Self::value_by_flag(ARG_LOG_FILE, &vector),
            no_log_file: Self::has_flag(ARG_NO_LOG_FILE, &vector),
        }
    }

    fn has_flag(flag: &str, i: &[String]) -> bool {
        i.iter()
            .any(|e| e.strip_prefix("--").is_some_and(|without_dashes| without_dashes == flag))
    }

    fn value_by_flag(flag: &str, i: &[String]) -> Option<String> {
        let mut iter = i.iter().peekable();

        while let Some(arg) = iter.next() {
            let Some(name) = arg.strip_prefix("--") else {
                continue;
            };

            // --flag=value
            if let Some((name, value)) = name.split_once('=') {
                if name == flag {
                    return Some(value.to_owned());
                }
                continue;
            }

            if name == flag {
                return iter
                    .peek()
                    .filter(|next| !next.starts_with("--"))
                    .map(|next| (*next).to_owned());
            }
        }

        None
    }
}

impl AppEnvironment {
    // Runs before the logger exists; the caller logs the result.
    pub fn cmd_args() -> Args {
        Args::parse(std::env::args().skip(1))
    }
}
