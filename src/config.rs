use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_name: String,
    pub host: String,
    pub port: u16,
    pub public_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            env::var("MONGODB_URL").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let database_name = env::var("MONGODB_DB").unwrap_or_else(|_| "productDB".to_string());
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let public_dir = env::var("PUBLIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("public"));
        Ok(Self {
            database_url,
            database_name,
            host,
            port,
            public_dir,
        })
    }

    /// Where uploaded product images land; served as a static asset path.
    pub fn upload_dir(&self) -> PathBuf {
        self.public_dir.join("uploads").join("images")
    }
}
