use std::path::PathBuf;

use crate::repository::ProductRepository;
use crate::views::Views;

#[derive(Clone)]
pub struct AppState {
    pub repo: ProductRepository,
    pub views: Views,
    pub upload_dir: PathBuf,
}
