use crate::controller::Page;
use crate::event::EventTable;
use crate::pages::PageId;
use crate::template_store::NOT_FOUND_TEMPLATE;

pub struct NotFoundPage {
    events: EventTable,
}

impl NotFoundPage {
    pub fn new() -> Self {
        NotFoundPage { events: EventTable::new() }
    }
}

impl Page for NotFoundPage {
    fn id(&self) -> PageId { PageId::NotFound }
    fn template(&self) -> &str { NOT_FOUND_TEMPLATE }
    fn events(&self) -> &EventTable { &self.events }
}
