use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub token_file: PathBuf,
    pub email_domain: String,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String, token_file: PathBuf, email_domain: String) -> Self {
        Self {
            api_url,
            token_file,
            email_domain,
        }
    }
}
