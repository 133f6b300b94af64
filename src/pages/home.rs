use crate::acontext::PageContext;
use crate::controller::{MainState, Page};
use crate::error::PageError;
use crate::event::EventTable;
use crate::pages::PageId;

pub struct HomePage {
    events: EventTable,
}

impl HomePage {
    pub fn new() -> Self {
        HomePage { events: EventTable::new() }
    }
}

impl Page for HomePage {
    fn id(&self) -> PageId { PageId::Home }
    fn template(&self) -> &str { "home.html" }
    fn events(&self) -> &EventTable { &self.events }

    fn prepare(&self, main: &mut MainState, context: &PageContext) -> Result<(), PageError> {
        let link = if context.session().is_authenticated() {
            PageId::Dashboard
        } else {
            PageId::UserAccess
        };
        main.data.insert("home-link", link.path());
        main.data.insert("home-link-text", context.text(&format!("link-{}", link.as_str())));
        Ok(())
    }
}
