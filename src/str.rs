//! Character classes and scanners for the XML parser.
//!
//! Every `end_of_*` method returns the byte offset where the matching
//! run ends, or `None` when the input does not start with one.

pub trait XmlStr {
    fn end_of_attribute(&self, quote: char) -> Option<usize>;
    fn end_of_char_data(&self) -> Option<usize>;
    fn end_of_cdata(&self) -> Option<usize>;
    fn end_of_decimal_chars(&self) -> Option<usize>;
    fn end_of_hex_chars(&self) -> Option<usize>;
    fn end_of_comment(&self) -> Option<usize>;
    fn end_of_pi_value(&self) -> Option<usize>;
    fn end_of_name(&self) -> Option<usize>;
    fn end_of_space(&self) -> Option<usize>;
}

fn end_of_start_rest<F1, F2>(s: &str, is_first: F1, is_rest: F2) -> Option<usize>
where
    F1: Fn(char) -> bool,
    F2: Fn(char) -> bool,
{
    let mut positions = s.char_indices();

    match positions.next() {
        Some((_, c)) if is_first(c) => (),
        _ => return None,
    };

    let mut positions = positions.skip_while(|&(_, c)| is_rest(c));
    match positions.next() {
        Some((offset, _)) => Some(offset),
        None => Some(s.len()),
    }
}

impl<'a> XmlStr for &'a str {
    fn end_of_attribute(&self, quote: char) -> Option<usize> {
        if self.is_empty() || self.starts_with('&') || self.starts_with('<') || self.starts_with(quote) {
            return None;
        }

        match self.find(|c| c == '&' || c == '<' || c == quote) {
            Some(offset) => Some(offset),
            None => Some(self.len()),
        }
    }

    fn end_of_char_data(&self) -> Option<usize> {
        if self.starts_with('<') || self.starts_with('&') || self.starts_with("]]>") {
            return None;
        }

        let mut positions = self.char_indices().skip_while(|&(_, c)| c != '<' && c != '&' && c != ']');

        loop {
            match positions.next() {
                None => return Some(self.len()),
                Some((offset, c)) if c == '<' || c == '&' => return Some(offset),
                Some((offset, _)) => {
                    if self[offset..].starts_with("]]>") {
                        return Some(offset);
                    }
                    // A lone bracket, keep scanning
                }
            }
        }
    }

    fn end_of_cdata(&self) -> Option<usize> {
        self.find("]]>")
    }

    fn end_of_decimal_chars(&self) -> Option<usize> {
        end_of_start_rest(self, |c| c.is_decimal_char(), |c| c.is_decimal_char())
    }

    fn end_of_hex_chars(&self) -> Option<usize> {
        end_of_start_rest(self, |c| c.is_hex_char(), |c| c.is_hex_char())
    }

    fn end_of_comment(&self) -> Option<usize> {
        // The closing > is checked by the caller; -- may not appear
        // inside a comment at all.
        self.find("--")
    }

    fn end_of_pi_value(&self) -> Option<usize> {
        self.find("?>")
    }

    fn end_of_name(&self) -> Option<usize> {
        end_of_start_rest(self, |c| c.is_name_start_char(), |c| c.is_name_char())
    }

    fn end_of_space(&self) -> Option<usize> {
        end_of_start_rest(self, |c| c.is_space_char(), |c| c.is_space_char())
    }
}

pub trait XmlChar {
    fn is_name_start_char(self) -> bool;
    fn is_name_char(self) -> bool;
    fn is_space_char(self) -> bool;
    fn is_decimal_char(self) -> bool;
    fn is_hex_char(self) -> bool;
}

impl XmlChar for char {
    fn is_name_start_char(self) -> bool {
        matches!(self,
            ':'                         |
            'A'..='Z'                   |
            '_'                         |
            'a'..='z'                   |
            '\u{0000C0}'..='\u{0000D6}' |
            '\u{0000D8}'..='\u{0000F6}' |
            '\u{0000F8}'..='\u{0002FF}' |
            '\u{000370}'..='\u{00037D}' |
            '\u{00037F}'..='\u{001FFF}' |
            '\u{00200C}'..='\u{00200D}' |
            '\u{002070}'..='\u{00218F}' |
            '\u{002C00}'..='\u{002FEF}' |
            '\u{003001}'..='\u{00D7FF}' |
            '\u{00F900}'..='\u{00FDCF}' |
            '\u{00FDF0}'..='\u{00FFFD}' |
            '\u{010000}'..='\u{0EFFFF}'
        )
    }

    fn is_name_char(self) -> bool {
        self.is_name_start_char()
            || matches!(self,
                '-'                      |
                '.'                      |
                '0'..='9'                |
                '\u{00B7}'               |
                '\u{0300}'..='\u{036F}'  |
                '\u{203F}'..='\u{2040}'
            )
    }

    fn is_space_char(self) -> bool {
        matches!(self, '\x20' | '\x09' | '\x0D' | '\x0A')
    }

    fn is_decimal_char(self) -> bool {
        self.is_ascii_digit()
    }

    fn is_hex_char(self) -> bool {
        self.is_ascii_hexdigit()
    }
}

#[cfg(test)]
mod test {
    use super::XmlStr;

    #[test]
    fn end_of_char_data_leading_ampersand() {
        assert_eq!("&".end_of_char_data(), None);
    }

    #[test]
    fn end_of_char_data_leading_cdata_end() {
        assert_eq!("]]>".end_of_char_data(), None);
    }

    #[test]
    fn end_of_char_data_until_less_than() {
        assert_eq!("soil<keyword".end_of_char_data(), Some("soil".len()));
    }

    #[test]
    fn end_of_char_data_until_cdata_end() {
        assert_eq!("hello]]>world".end_of_char_data(), Some("hello".len()));
    }

    #[test]
    fn end_of_char_data_includes_right_square() {
        assert_eq!("range [1]".end_of_char_data(), Some("range [1]".len()));
    }

    #[test]
    fn end_of_attribute_stops_at_the_matching_quote() {
        assert_eq!("it's\"".end_of_attribute('"'), Some("it's".len()));
        assert_eq!("it's\"".end_of_attribute('\''), Some("it".len()));
    }

    #[test]
    fn end_of_name_accepts_prefixed_names() {
        assert_eq!("xml:lang=".end_of_name(), Some("xml:lang".len()));
        assert_eq!("1abc".end_of_name(), None);
    }

    #[test]
    fn end_of_name_handles_multibyte_characters() {
        assert_eq!("nœud>".end_of_name(), Some("nœud".len()));
    }

    #[test]
    fn end_of_space_requires_leading_space() {
        assert_eq!(" \t\nx".end_of_space(), Some(3));
        assert_eq!("x ".end_of_space(), None);
    }

    #[test]
    fn end_of_hex_chars_stops_at_semicolon() {
        assert_eq!("1F;".end_of_hex_chars(), Some(2));
    }
}
