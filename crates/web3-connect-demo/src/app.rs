//! Main application state and update loop

use std::sync::{Arc, Mutex};

use eframe::egui;
use tokio::runtime::Runtime;

use web3_connect_connectors::ConnectorConfig;
use web3_connect_core::{
    ContextUpdates, InitializedConnector, Web3ContextProvider, Web3ContextValue, Web3Error,
};

use crate::cards::{self, CardState};
use crate::connectors;

pub struct App {
    runtime: Runtime,
    connectors: Vec<InitializedConnector>,
    cards: Vec<CardState>,
    /// Latest context value, refreshed whenever a store changes
    priority: Arc<Mutex<Option<Web3ContextValue>>>,
}

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, runtime: Runtime) -> Result<Self, Web3Error> {
        let config = ConnectorConfig::from_env();
        let connectors = connectors::build(&config);
        let provider =
            Web3ContextProvider::new(connectors.clone())?.with_lookup_ens(config.lookup_ens);
        let priority = Arc::new(Mutex::new(None));

        for entry in &connectors {
            let connector = Arc::clone(&entry.connector);
            runtime.spawn(async move {
                if let Err(e) = connector.connect_eagerly().await {
                    tracing::debug!(error = %e, "eager connect failed");
                }
            });
        }
        Self::watch_stores(
            &runtime,
            cc.egui_ctx.clone(),
            provider.updates(connectors.clone())?,
            &priority,
        );

        let cards = connectors.iter().map(|_| CardState::default()).collect();
        Ok(Self {
            runtime,
            connectors,
            cards,
            priority,
        })
    }

    /// Publishes a new context value whenever any store changes.
    fn watch_stores(
        runtime: &Runtime,
        ctx: egui::Context,
        mut updates: ContextUpdates,
        priority: &Arc<Mutex<Option<Web3ContextValue>>>,
    ) {
        let priority = Arc::clone(priority);
        runtime.spawn(async move {
            while let Some(result) = updates.next().await {
                match result {
                    Ok(value) => {
                        if let Ok(mut g) = priority.lock() {
                            *g = Some(value);
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "failed to render context"),
                }
                ctx.request_repaint();
            }
        });
    }

    fn priority_panel(&self, ui: &mut egui::Ui) {
        let value = self.priority.lock().ok().and_then(|g| g.clone());
        let Some(value) = value else {
            ui.spinner();
            return;
        };
        ui.label(
            egui::RichText::new(format!("Priority connector: {}", value.connector.kind())).strong(),
        );
        match value.chain_id {
            Some(chain_id) => ui.label(format!("Chain: {}", cards::chain_label(chain_id))),
            None => ui.label(egui::RichText::new("Chain: -").weak()),
        };
        let accounts: Vec<String> = value
            .accounts
            .unwrap_or_default()
            .iter()
            .map(|a| a.to_string())
            .collect();
        cards::accounts(ui, &accounts, &value.ens_names);
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading(egui::RichText::new("web3-connect").size(20.0).strong());
            self.priority_panel(ui);
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    let handle = self.runtime.handle();
                    for (entry, state) in self.connectors.iter().zip(self.cards.iter_mut()) {
                        cards::connector_card(ui, handle, entry, state);
                    }
                });
            });
        });
    }
}
