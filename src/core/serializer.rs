/*
 * Renders an `InterfaceConfig` back to file text. Sections are emitted in their
 * recorded order, entries in their recorded order. Every line of a disabled
 * section, its header included, carries the disabled prefix. In non-plain mode a
 * header with the checksum of the plain body is prepended; the checksum is
 * computed over exactly the text that follows the header.
 */
use super::checksum_utils::compute_checksum;
use super::line_classifier::{HEADER_NOTICE, MetaPrefixes};
use super::models::{InterfaceConfig, Section, SectionEntry};

pub fn render_interface_config(
    config: &InterfaceConfig,
    prefixes: &MetaPrefixes,
    plain: bool,
) -> String {
    let body = render_body(config, prefixes);
    if plain {
        return body;
    }
    let checksum = compute_checksum(&body);
    log::trace!(
        "Serializer: Rendered '{}' with checksum {checksum}",
        config.name()
    );
    let mut text = render_header(prefixes, checksum);
    text.push_str(&body);
    text
}

fn render_header(prefixes: &MetaPrefixes, checksum: u32) -> String {
    format!(
        "{HEADER_NOTICE} Metadata lines start with '{}', disabled lines with '{}'.\n{} = {checksum}\n\n",
        prefixes.metadata(),
        prefixes.disabled(),
        prefixes.checksum_marker(),
    )
}

fn render_body(config: &InterfaceConfig, prefixes: &MetaPrefixes) -> String {
    let mut body = String::new();
    for section in config.sections() {
        render_section(&mut body, section, prefixes);
    }
    body
}

fn render_section(out: &mut String, section: &Section, prefixes: &MetaPrefixes) {
    let line_prefix = if section.is_disabled() {
        prefixes.disabled()
    } else {
        ""
    };
    out.push_str(&format!("{line_prefix}[{}]\n", section.section_type()));
    for entry in section.entries() {
        match entry {
            SectionEntry::Metadata { key, value } => out.push_str(&format!(
                "{line_prefix}{}{key} = {value}\n",
                prefixes.metadata()
            )),
            SectionEntry::Plain { key, value } => {
                out.push_str(&format!("{line_prefix}{key} = {value}\n"))
            }
            SectionEntry::Comment(text) => out.push_str(&format!("{line_prefix}{text}\n")),
        }
    }
    out.push('\n');
}
