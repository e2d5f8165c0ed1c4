//! Unit data fetching
//!
//! Fetches run on the browser's event loop and drop their bodies into a shared
//! queue; an `Update` system parses them and feeds the [`UnitDirectory`].

use bevy::prelude::*;
use depot_core::{parse_csv, parse_sheet_json, DataSource, IngestError, IngestReport};
use depot_scene::{UnitDirectory, ViewerSettings};
use std::sync::{Arc, Mutex};

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingUnits>()
            .init_resource::<FetchState>()
            .add_message::<RefetchUnits>()
            .add_systems(Startup, request_initial_units)
            .add_systems(Update, (handle_refetch, process_pending_units).chain());
    }
}

type FetchResult = Result<String, IngestError>;

/// Response bodies from async fetches, tagged with their request number
#[derive(Resource, Default, Clone)]
pub struct PendingUnits(pub Arc<Mutex<Vec<(u64, FetchResult)>>>);

/// Request bookkeeping; only the newest request may update the directory
#[derive(Resource, Debug, Default)]
pub struct FetchState {
    pub request: u64,
    pub in_flight: bool,
}

impl FetchState {
    fn begin(&mut self) -> u64 {
        self.request += 1;
        self.in_flight = true;
        self.request
    }

    /// Whether a result for `request` is still wanted
    fn settle(&mut self, request: u64) -> bool {
        if request != self.request {
            return false;
        }
        self.in_flight = false;
        true
    }
}

/// Ask for the unit data to be fetched again
#[derive(Message, Debug, Clone, Default)]
pub struct RefetchUnits;

/// Parse a response body according to the configured source
pub fn parse_body(source: &DataSource, body: &str) -> Result<IngestReport, IngestError> {
    match source {
        DataSource::Sheets { .. } => parse_sheet_json(body),
        DataSource::Csv { .. } | DataSource::Static => parse_csv(body),
    }
}

fn source_name(source: &DataSource) -> &'static str {
    match source {
        DataSource::Csv { .. } => "CSV export",
        DataSource::Sheets { .. } => "Sheets API",
        DataSource::Static => "built-in data",
    }
}

/// Start a fetch for `source`. Returns `false` when there is nothing to fetch.
fn start_fetch(source: &DataSource, state: &mut FetchState, pending: &PendingUnits) -> bool {
    let Some(url) = source.url() else {
        return false;
    };
    let request = state.begin();
    tracing::info!("Fetching unit data from {} (request {})", source_name(source), request);
    spawn_fetch(url, request, pending.0.clone());
    true
}

#[cfg(target_arch = "wasm32")]
fn spawn_fetch(url: String, request: u64, queue: Arc<Mutex<Vec<(u64, FetchResult)>>>) {
    use wasm_bindgen_futures::spawn_local;

    spawn_local(async move {
        let result = fetch_text(&url).await;
        if let Ok(mut queue) = queue.lock() {
            queue.push((request, result));
        }
    });
}

#[cfg(target_arch = "wasm32")]
async fn fetch_text(url: &str) -> FetchResult {
    let response = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| IngestError::Network(e.to_string()))?;
    if !response.ok() {
        return Err(IngestError::Http {
            status: response.status(),
            status_text: response.status_text(),
        });
    }
    response
        .text()
        .await
        .map_err(|e| IngestError::Network(e.to_string()))
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn_fetch(_url: String, request: u64, queue: Arc<Mutex<Vec<(u64, FetchResult)>>>) {
    let result = Err(IngestError::Network(
        "remote unit data is only fetched in the browser".to_string(),
    ));
    if let Ok(mut queue) = queue.lock() {
        queue.push((request, result));
    }
}

fn request_initial_units(
    settings: Res<ViewerSettings>,
    mut state: ResMut<FetchState>,
    pending: Res<PendingUnits>,
    mut directory: ResMut<UnitDirectory>,
) {
    if !start_fetch(&settings.data, &mut state, &pending) {
        tracing::info!("No unit data source configured, using built-in units");
        directory.mark_static();
    }
}

fn handle_refetch(
    mut refetch: MessageReader<RefetchUnits>,
    settings: Res<ViewerSettings>,
    mut state: ResMut<FetchState>,
    pending: Res<PendingUnits>,
) {
    if refetch.read().count() == 0 {
        return;
    }
    if !start_fetch(&settings.data, &mut state, &pending) {
        tracing::debug!("Refetch ignored, no data source configured");
    }
}

fn process_pending_units(
    pending: Res<PendingUnits>,
    settings: Res<ViewerSettings>,
    mut state: ResMut<FetchState>,
    mut directory: ResMut<UnitDirectory>,
) {
    let results = {
        if let Ok(mut queue) = pending.0.lock() {
            std::mem::take(&mut *queue)
        } else {
            Vec::new()
        }
    };

    for (request, body) in results {
        if !state.settle(request) {
            tracing::debug!(
                "Discarding unit data for request {} (superseded by {})",
                request,
                state.request
            );
            continue;
        }
        let parsed = body.and_then(|text| parse_body(&settings.data, &text));
        directory.apply(parsed);
    }
}
