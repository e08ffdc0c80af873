// Wire types shared by the wizard, the client, and the proxy.
// Field names follow the original wire format exactly (camelCase for report
// and chat types, snake_case for the opportunity feed).

pub mod chat;
pub mod opportunity;
pub mod report;
