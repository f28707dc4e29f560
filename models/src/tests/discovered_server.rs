use crate::{DiscoveredServer, Endpoint};

#[test]
fn given_labelled_server_when_rendered_then_includes_label_and_address() {
    let server = DiscoveredServer::new(Endpoint::new("192.168.1.20", 5000).unwrap())
        .with_label("OFFICE-PC");

    assert_eq!(server.address(), "192.168.1.20:5000");
    assert_eq!(server.display_name(), "OFFICE-PC (192.168.1.20:5000)");
}

/// **VALUE**: Verifies blank labels are dropped rather than rendered as `" (host:port)"`.
///
/// **BUG THIS CATCHES**: Would catch a bridge reporting `"name": ""` producing odd list rows.
#[test]
fn given_blank_label_when_attached_then_treated_as_unlabelled() {
    let server =
        DiscoveredServer::new(Endpoint::new("192.168.1.21", 5000).unwrap()).with_label("  ");

    assert_eq!(server.label, None);
    assert_eq!(server.display_name(), "192.168.1.21:5000");
}
