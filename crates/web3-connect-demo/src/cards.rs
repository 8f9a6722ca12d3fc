//! Connector cards: status, chain, accounts and connect controls.

use std::sync::{Arc, Mutex};

use eframe::egui;
use tokio::runtime::Handle;

use web3_connect_connectors::chains;
use web3_connect_core::{ActivationRequest, Connector, EnsNames, InitializedConnector};

#[derive(Default)]
pub struct CardState {
    /// `None` connects on the wallet's current chain.
    pub desired_chain: Option<u64>,
    pub error: Arc<Mutex<Option<String>>>,
}

impl CardState {
    fn error(&self) -> Option<String> {
        self.error.lock().ok().and_then(|g| g.clone())
    }

    fn set_error(slot: &Arc<Mutex<Option<String>>>, error: Option<String>) {
        if let Ok(mut g) = slot.lock() {
            *g = error;
        }
    }
}

pub fn chain_label(chain_id: u64) -> String {
    match chains::chain(chain_id) {
        Some(info) => format!("{} ({chain_id})", info.name),
        None => format!("Chain {chain_id}"),
    }
}

fn status(ui: &mut egui::Ui, activating: bool, active: bool, error: Option<&str>) {
    if let Some(error) = error {
        ui.colored_label(egui::Color32::from_rgb(220, 80, 60), format!("🔴 {error}"));
    } else if activating {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Connecting");
        });
    } else if active {
        ui.label("🟢 Connected");
    } else {
        ui.label("⚪️ Disconnected");
    }
}

pub fn accounts(ui: &mut egui::Ui, accounts: &[String], names: &EnsNames) {
    if accounts.is_empty() {
        ui.label(egui::RichText::new("None").weak());
        return;
    }
    for (i, account) in accounts.iter().enumerate() {
        let text = match names.get(i).as_deref() {
            Some(name) => format!("{account} ({name})"),
            None => account.clone(),
        };
        ui.label(egui::RichText::new(text).monospace().size(11.0));
    }
}

fn spawn_activation(
    handle: &Handle,
    ctx: egui::Context,
    connector: Arc<dyn Connector>,
    request: ActivationRequest,
    error: Arc<Mutex<Option<String>>>,
) {
    CardState::set_error(&error, None);
    handle.spawn(async move {
        if let Err(e) = connector.activate(request).await {
            tracing::warn!(connector = %connector.kind(), error = %e, "activation failed");
            CardState::set_error(&error, Some(e.to_string()));
        }
        ctx.request_repaint();
    });
}

fn spawn_deactivation(
    handle: &Handle,
    ctx: egui::Context,
    connector: Arc<dyn Connector>,
    error: Arc<Mutex<Option<String>>>,
) {
    CardState::set_error(&error, None);
    handle.spawn(async move {
        if let Err(e) = connector.deactivate().await {
            CardState::set_error(&error, Some(e.to_string()));
        }
        ctx.request_repaint();
    });
}

pub fn connector_card(
    ui: &mut egui::Ui,
    handle: &Handle,
    entry: &InitializedConnector,
    state: &mut CardState,
) {
    let connector = &entry.connector;
    let hooks = &entry.hooks;
    let error = state.error();

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_min_width(260.0);
        ui.heading(
            egui::RichText::new(connector.kind().display_name())
                .size(16.0)
                .strong(),
        );
        status(ui, hooks.is_activating(), hooks.is_active(), error.as_deref());

        ui.add_space(4.0);
        match hooks.chain_id() {
            Some(chain_id) => ui.label(format!("Chain: {}", chain_label(chain_id))),
            None => ui.label(egui::RichText::new("Chain: -").weak()),
        };
        let accounts_text: Vec<String> = hooks
            .accounts()
            .unwrap_or_default()
            .iter()
            .map(|a| a.to_string())
            .collect();
        ui.label("Accounts:");
        accounts(ui, &accounts_text, &EnsNames::Unknown(accounts_text.len()));

        ui.add_space(6.0);
        let capabilities = connector.capabilities();
        if capabilities.supports_chain_switch {
            let selected = state
                .desired_chain
                .map(chain_label)
                .unwrap_or_else(|| "Default chain".to_owned());
            egui::ComboBox::from_id_salt(("chain_select", connector.id()))
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut state.desired_chain, None, "Default chain");
                    for chain in chains::CHAINS {
                        ui.selectable_value(
                            &mut state.desired_chain,
                            Some(chain.chain_id),
                            chain_label(chain.chain_id),
                        );
                    }
                });
        }

        let request = match state.desired_chain {
            Some(chain_id) if capabilities.accepts_chain_parameters => {
                chains::add_chain_parameters(chain_id)
            }
            Some(chain_id) => ActivationRequest::Chain(chain_id),
            None => ActivationRequest::Default,
        };

        ui.horizontal(|ui| {
            let ctx = ui.ctx().clone();
            if hooks.is_active() {
                if capabilities.supports_chain_switch && ui.button("Switch chain").clicked() {
                    spawn_activation(
                        handle,
                        ctx.clone(),
                        Arc::clone(connector),
                        request.clone(),
                        Arc::clone(&state.error),
                    );
                }
                if ui.button("Disconnect").clicked() {
                    let slot = Arc::clone(&state.error);
                    spawn_deactivation(handle, ctx, Arc::clone(connector), slot);
                }
            } else {
                let label = if error.is_some() { "Try again?" } else { "Connect" };
                if ui
                    .add_enabled(!hooks.is_activating(), egui::Button::new(label))
                    .clicked()
                {
                    let slot = Arc::clone(&state.error);
                    spawn_activation(handle, ctx, Arc::clone(connector), request, slot);
                }
            }
        });
    });
}
