//! The language server: vault indexing, hover, go-to-definition and inlay hints.

use std::ffi::OsStr;
use std::ops::Range as ByteRange;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ropey::Rope;
use tokio::sync::RwLock;
use tower_lsp::async_trait;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    DidChangeConfigurationParams, DidChangeTextDocumentParams, DidChangeWatchedFilesParams,
    DidCloseTextDocumentParams, DidOpenTextDocumentParams, DidSaveTextDocumentParams,
    FileChangeType, GotoDefinitionParams, GotoDefinitionResponse, Hover, HoverParams,
    HoverProviderCapability, InitializeParams, InitializeResult, InitializedParams, InlayHint,
    InlayHintLabel, InlayHintParams, OneOf, Position, Range, ServerCapabilities, ServerInfo,
    TextDocumentItem, TextDocumentSyncCapability, TextDocumentSyncKind, Url,
};
use tower_lsp::Client;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::decorations::{build_decorations, CharacterOverride};
use crate::gotodef::goto_definition;
use crate::hover::hover;
use crate::vault::{MyRange, Vault};

pub trait LspClient: Send + Sync + Clone + 'static {}
impl LspClient for Client {}

pub struct Backend<C = Client> {
    _client: C,
    root_dir: Arc<RwLock<Option<PathBuf>>>,
    vault: Arc<RwLock<Option<Vault>>>,
    settings: Arc<RwLock<Settings>>,
}

impl Backend<Client> {
    pub fn new(client: Client) -> Self {
        Self::with_client(client)
    }
}

impl<C: LspClient> Backend<C> {
    pub fn with_client(client: C) -> Self {
        Self {
            _client: client,
            root_dir: Arc::new(RwLock::new(None)),
            vault: Arc::new(RwLock::new(None)),
            settings: Arc::new(RwLock::new(Settings::default())),
        }
    }

    async fn settings(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Reads the layered settings of the workspace again. Requests after this see the
    /// new settings; a failed read keeps the old ones.
    async fn reload_settings(&self) {
        let Some(root_dir) = self.root_dir.read().await.clone() else {
            return;
        };
        match Settings::new(&root_dir) {
            Ok(settings) => {
                *self.settings.write().await = settings;
                info!(root = %root_dir.display(), "reloaded settings");
            }
            Err(err) => warn!(%err, "could not reload settings, keeping the previous ones"),
        }
    }

    /// Re-indexes one open document.
    async fn update_document(&self, uri: &Url, text: &str) {
        let Some(path) = markdown_path(uri) else {
            return;
        };
        if let Some(vault) = self.vault.write().await.as_mut() {
            Vault::update_vault(vault, (&path, text));
        }
    }

    async fn inlay_hints(&self, uri: &Url, range: Range) -> Option<Vec<InlayHint>> {
        let path = uri.to_file_path().ok()?;
        let settings = self.settings().await;
        let guard = self.vault.read().await;
        let vault = guard.as_ref()?;

        let rope = vault.ropes.get(&path)?;
        let links = &vault.md_files.get(&path)?.range_links;
        let visible = [byte_offset(rope, range.start)..byte_offset(rope, range.end)];

        let (decorations, _) = build_decorations(links, &visible, vault, &settings, None, &[]);

        Some(
            decorations
                .iter()
                .map(|decoration| to_inlay_hint(rope, decoration))
                .collect(),
        )
    }
}

/// `.linkrange/settings.*` or the persisted `.linkrange/data.json` of the workspace.
fn is_settings_file(root_dir: &Path, path: &Path) -> bool {
    path.parent() == Some(root_dir.join(".linkrange").as_path())
        && (path.file_name() == Some(OsStr::new("data.json"))
            || path.file_stem() == Some(OsStr::new("settings")))
}

fn markdown_path(uri: &Url) -> Option<PathBuf> {
    let path = uri.to_file_path().ok()?;
    (path.extension().and_then(|e| e.to_str()) == Some("md")).then_some(path)
}

/// The directory the client opened, from the workspace folders or the root URI.
#[allow(deprecated)]
fn root_dir(params: &InitializeParams) -> Option<PathBuf> {
    params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .map(|folder| &folder.uri)
        .or(params.root_uri.as_ref())
        .and_then(|uri| uri.to_file_path().ok())
}

fn byte_offset(rope: &Rope, position: Position) -> usize {
    let line = (position.line as usize).min(rope.len_lines());
    if line == rope.len_lines() {
        return rope.len_bytes();
    }
    let line_start = rope.line_to_char(line);
    let line_len = rope.line(line).len_chars();
    let char_index = line_start + (position.character as usize).min(line_len);
    rope.char_to_byte(char_index)
}

fn to_inlay_hint(rope: &Rope, decoration: &CharacterOverride) -> InlayHint {
    let ByteRange { start, end } = decoration.range();
    let range = MyRange::from_range(rope, start..end.min(rope.len_bytes()));

    InlayHint {
        position: range.start,
        label: InlayHintLabel::String(decoration.visual.clone()),
        kind: None,
        text_edits: None,
        tooltip: None,
        padding_left: None,
        padding_right: None,
        data: None,
    }
}

#[async_trait]
impl<C: LspClient> tower_lsp::LanguageServer for Backend<C> {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(root_dir) = root_dir(&params) {
            match Settings::new(&root_dir) {
                Ok(settings) => *self.settings.write().await = settings,
                Err(err) => warn!(%err, "could not load settings, using defaults"),
            }

            match Vault::construct_vault(&root_dir) {
                Ok(vault) => *self.vault.write().await = Some(vault),
                Err(err) => warn!(root = %root_dir.display(), %err, "could not index vault"),
            }

            *self.root_dir.write().await = Some(root_dir);
        } else {
            warn!("no workspace root; range links will not resolve");
        }

        let capabilities = ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
            hover_provider: Some(HoverProviderCapability::Simple(true)),
            definition_provider: Some(OneOf::Left(true)),
            inlay_hint_provider: Some(OneOf::Left(true)),
            ..ServerCapabilities::default()
        };

        Ok(InitializeResult {
            capabilities,
            server_info: Some(ServerInfo {
                name: "linkrange".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("linkrange server initialized");
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let TextDocumentItem { uri, text, .. } = params.text_document;
        self.update_document(&uri, &text).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        if let Some(change) = params.content_changes.into_iter().last() {
            self.update_document(&params.text_document.uri, &change.text)
                .await;
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        if let Some(text) = params.text {
            self.update_document(&params.text_document.uri, &text).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        debug!(uri = %params.text_document.uri, "document closed");
    }

    async fn did_change_configuration(&self, _: DidChangeConfigurationParams) {
        self.reload_settings().await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        let settings_changed = match self.root_dir.read().await.as_deref() {
            Some(root_dir) => params.changes.iter().any(|change| {
                change
                    .uri
                    .to_file_path()
                    .is_ok_and(|path| is_settings_file(root_dir, &path))
            }),
            None => false,
        };
        if settings_changed {
            self.reload_settings().await;
        }

        let mut guard = self.vault.write().await;
        let Some(vault) = guard.as_mut() else {
            return;
        };

        for change in params.changes {
            let Some(path) = markdown_path(&change.uri) else {
                continue;
            };
            if change.typ == FileChangeType::DELETED {
                vault.remove_file(&path);
                continue;
            }
            match tokio::fs::read_to_string(&path).await {
                Ok(text) => Vault::update_vault(vault, (&path, &text)),
                Err(err) => warn!(path = %path.display(), %err, "could not re-index file"),
            }
        }
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let position_params = params.text_document_position_params;
        let Ok(path) = position_params.text_document.uri.to_file_path() else {
            return Ok(None);
        };
        let settings = self.settings().await;
        let guard = self.vault.read().await;
        let Some(vault) = guard.as_ref() else {
            return Ok(None);
        };

        Ok(hover(vault, &path, position_params.position, &settings).await)
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let position_params = params.text_document_position_params;
        let Ok(path) = position_params.text_document.uri.to_file_path() else {
            return Ok(None);
        };
        let settings = self.settings().await;
        let guard = self.vault.read().await;
        let Some(vault) = guard.as_ref() else {
            return Ok(None);
        };

        Ok(
            goto_definition(vault, position_params.position, &path, &settings)
                .map(GotoDefinitionResponse::Array),
        )
    }

    async fn inlay_hint(&self, params: InlayHintParams) -> Result<Option<Vec<InlayHint>>> {
        Ok(self.inlay_hints(&params.text_document.uri, params.range).await)
    }
}
