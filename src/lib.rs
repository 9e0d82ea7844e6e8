/*
 * wg-meta: a metadata layer for WireGuard-style interface configs. Names,
 * aliases and an enabled/disabled flag are stored as specially prefixed comment
 * lines, so the files stay valid input for tools that only know the plain format.
 */
pub mod core;
