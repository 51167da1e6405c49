/*!
 Renders an item graph in the style of an XML property list, for debugging.

 The output is presentation only: it walks the graph read-only through an
 exhaustive match over the [`Item`] variants and never feeds back into the
 codec.
*/

use std::fmt::Write;

use crate::{
    plist::models::{Item, ItemRef},
    util::dates::from_apple_seconds,
};

/// Render the graph rooted at `root`, one node per line, indented two
/// spaces per nesting level
pub fn dump(root: &ItemRef) -> String {
    let mut out = String::new();
    render(root, 0, &mut out);
    out
}

fn print(out: &mut String, depth: usize, line: &str) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str(line);
    out.push('\n');
}

fn render(item: &Item, depth: usize, out: &mut String) {
    match item {
        Item::Null => print(out, depth, "<null/>"),
        Item::Bool(true) => print(out, depth, "<true/>"),
        Item::Bool(false) => print(out, depth, "<false/>"),
        Item::Int(value) => print(out, depth, &format!("<int>{value}</int>")),
        Item::Real(value) => print(out, depth, &format!("<real>{value}</real>")),
        Item::Date(seconds) => {
            let rendered = match from_apple_seconds(*seconds) {
                Some(date) => date.to_rfc3339(),
                None => seconds.to_string(),
            };
            print(out, depth, &format!("<date>{rendered}</date>"));
        }
        Item::Data(bytes) => {
            let mut hex = String::with_capacity(bytes.len() * 2);
            for byte in bytes {
                let _ = write!(hex, "{byte:02x}");
            }
            print(out, depth, &format!("<data>{hex}</data>"));
        }
        Item::String(string) => print(out, depth, &format!("<string>{string}</string>")),
        Item::Uid(value) => print(out, depth, &format!("<uid>{value}</uid>")),
        Item::Array(array) => {
            print(out, depth, "<array>");
            for child in array.items().iter() {
                render(child, depth + 1, out);
            }
            print(out, depth, "</array>");
        }
        Item::Set(set) => {
            print(out, depth, "<set>");
            for child in set.items().iter() {
                render(child, depth + 1, out);
            }
            print(out, depth, "</set>");
        }
        Item::Dict(dict) => {
            print(out, depth, "<dict>");
            for (key, value) in dict.entries().iter() {
                let text = key.as_str().unwrap_or_default();
                print(out, depth + 1, &format!("<key>{text}</key>"));
                render(value, depth + 1, out);
            }
            print(out, depth, "</dict>");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        plist::{array::BpArray, dict::BpDict, models::Item},
        util::dump::dump,
    };

    #[test]
    fn test_dump_scalars() {
        assert_eq!(dump(&Item::Null.into_ref()), "<null/>\n");
        assert_eq!(dump(&Item::Bool(true).into_ref()), "<true/>\n");
        assert_eq!(dump(&Item::Int(14).into_ref()), "<int>14</int>\n");
    }

    #[test]
    fn test_dump_nested() {
        let dict = BpDict::new()
            .with("key1", "value1")
            .with("key4", BpArray::new().with(56).with(false));
        let rendered = dump(&dict.into_item());

        let expected = "<dict>\n\
                        \x20 <key>key1</key>\n\
                        \x20 <string>value1</string>\n\
                        \x20 <key>key4</key>\n\
                        \x20 <array>\n\
                        \x20   <int>56</int>\n\
                        \x20   <false/>\n\
                        \x20 </array>\n\
                        </dict>\n";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_dump_data_as_hex() {
        let rendered = dump(&Item::Data(vec![0xDE, 0xAD, 0xBE, 0xEF]).into_ref());
        assert_eq!(rendered, "<data>deadbeef</data>\n");
    }

    #[test]
    fn test_dump_date_as_rfc3339() {
        let rendered = dump(&Item::Date(0.0).into_ref());
        assert_eq!(rendered, "<date>2001-01-01T00:00:00+00:00</date>\n");
    }
}
