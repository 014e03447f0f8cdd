pub mod advisor;
pub mod category;
pub mod dashboard;
pub mod report;
pub mod settings;
pub mod system;
pub mod transaction;

use crate::cli::registry::CommandRegistry;

pub fn register_all(registry: &mut CommandRegistry) {
    let groups = [
        dashboard::definitions(),
        transaction::definitions(),
        report::definitions(),
        category::definitions(),
        settings::definitions(),
        advisor::definitions(),
        system::definitions(),
    ];
    for entry in groups.into_iter().flatten() {
        registry.register(entry);
    }
}
