/*
 * Renders the config a newly provisioned peer installs on its own machine: an
 * `[Interface]` with the peer's private key and address, and a single `[Peer]`
 * pointing back at the server interface.
 */

#[derive(Debug, Clone, Copy)]
pub struct ClientConfigParams<'a> {
    pub private_key: &'a str,
    pub address: &'a str,
    pub server_public_key: &'a str,
    pub allowed_ips: &'a str,
    pub endpoint: Option<&'a str>,
    pub preshared_key: Option<&'a str>,
}

pub fn render_client_config(params: &ClientConfigParams<'_>) -> String {
    let mut text = String::new();
    text.push_str("[Interface]\n");
    text.push_str(&format!("PrivateKey = {}\n", params.private_key));
    text.push_str(&format!("Address = {}\n", params.address));
    text.push('\n');
    text.push_str("[Peer]\n");
    text.push_str(&format!("PublicKey = {}\n", params.server_public_key));
    if let Some(preshared_key) = params.preshared_key {
        text.push_str(&format!("PresharedKey = {preshared_key}\n"));
    }
    text.push_str(&format!("AllowedIPs = {}\n", params.allowed_ips));
    if let Some(endpoint) = params.endpoint {
        text.push_str(&format!("Endpoint = {endpoint}\n"));
    }
    text
}
