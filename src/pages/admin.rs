use serde_json::Value;
use tracing::info;

use crate::acontext::PageContext;
use crate::config::{ADMIN_PANEL, DEBUG_PANEL};
use crate::controller::{AccessLevel, MainState, Page};
use crate::error::PageError;
use crate::event::{EventScope, EventTable};
use crate::pages::PageId;

pub struct AdminPage {
    events: EventTable,
}

impl AdminPage {
    pub fn new() -> Self {
        AdminPage {
            events: EventTable::new()
                .on("toggle-debug-panel", toggle_debug_panel)
                .on("toggle-admin-panel", toggle_admin_panel),
        }
    }
}

fn on_off(context: &PageContext, path: &str) -> String {
    context.text(if context.config().flag(path) { "state-on" } else { "state-off" })
}

fn fill(main: &mut MainState, context: &PageContext) {
    main.data.insert("debug-panel-state", on_off(context, DEBUG_PANEL));
    main.data.insert("admin-panel-state", on_off(context, ADMIN_PANEL));
}

impl Page for AdminPage {
    fn id(&self) -> PageId { PageId::Admin }
    fn template(&self) -> &str { "admin.html" }
    fn access(&self) -> AccessLevel { AccessLevel::Admin }
    fn events(&self) -> &EventTable { &self.events }

    fn prepare(&self, main: &mut MainState, context: &PageContext) -> Result<(), PageError> {
        main.messages.insert("status", "");
        fill(main, context);
        Ok(())
    }
}

fn toggle(scope: &mut EventScope<'_>, path: &str) -> Result<(), PageError> {
    let on = !scope.context.config().flag(path);
    scope.context.set_config(path, Value::Bool(on))?;
    info!("{path} set to {on} by {:?}", scope.context.user());
    fill(scope.main, scope.context);
    let status = scope.context.text("settings-saved");
    scope.main.fields.insert("status", status);
    // the panels are part of the document chrome
    scope.main.response.set_refresh(true);
    Ok(())
}

fn toggle_debug_panel(scope: &mut EventScope<'_>) -> Result<(), PageError> {
    toggle(scope, DEBUG_PANEL)
}

fn toggle_admin_panel(scope: &mut EventScope<'_>) -> Result<(), PageError> {
    toggle(scope, ADMIN_PANEL)
}
