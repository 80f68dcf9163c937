/*!
 * Data Structures
 * Small-string storage for labels and messages
 */

mod inline_string;

pub use inline_string::InlineString;
