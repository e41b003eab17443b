use ebook_client::GenerationResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Generate(String),
    ToggleServerLogs,
    RefreshServerLogs,
    Download(GenerationResult),
}
