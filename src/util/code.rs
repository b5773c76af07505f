use super::{Code, Position};
use once_cell::unsync::OnceCell;

impl<'c> From<&'c str> for Code<'c> {
    fn from(value: &'c str) -> Self {
        Code::new(value)
    }
}

impl<'c> Code<'c> {
    pub fn new(value: &'c str) -> Self {
        Self {
            value,
            line_breaks: OnceCell::new(),
        }
    }

    pub fn obtain_line_breaks(&self) -> &Vec<usize> {
        self.line_breaks.get_or_init(|| {
            self.value
                .bytes()
                .enumerate()
                .filter_map(|(index, b)| if b == b'\n' { Some(index) } else { None })
                .collect()
        })
    }

    pub fn obtain_position(&self, pointer: usize) -> Position {
        let pointer = self.char_start(pointer.min(self.value.len()));
        let line_breaks = self.obtain_line_breaks();
        let index = match line_breaks.binary_search(&pointer) {
            Ok(index) | Err(index) => index,
        };

        if index == 0 {
            Position::new(1, self.value[..pointer].chars().count() + 1)
        } else {
            let break_point = line_breaks[index - 1] + 1;
            Position::new(index + 1, self.value[break_point..pointer].chars().count() + 1)
        }
    }

    /// End of the code point beginning at `pointer`; `pointer` itself when out of bounds.
    pub fn char_end(&self, pointer: usize) -> usize {
        if pointer >= self.value.len() {
            return self.value.len();
        }
        match self.value[self.char_start(pointer)..].chars().next() {
            Some(c) => self.char_start(pointer) + c.len_utf8(),
            None => pointer,
        }
    }

    /// Nearest char boundary at or before `pointer`.
    pub fn char_start(&self, mut pointer: usize) -> usize {
        pointer = pointer.min(self.value.len());
        while pointer > 0 && !self.value.is_char_boundary(pointer) {
            pointer -= 1;
        }
        pointer
    }

    /// Range of the last code point of the input; empty range for empty input.
    pub fn last_char_range(&self) -> std::ops::Range<usize> {
        if self.value.is_empty() {
            return 0..0;
        }
        let start = self.char_start(self.value.len() - 1);
        start..self.value.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_count_lines_and_columns() {
        let code = Code::from("ab\ncde\nf");
        assert_eq!(code.obtain_position(0), Position::new(1, 1));
        assert_eq!(code.obtain_position(1), Position::new(1, 2));
        assert_eq!(code.obtain_position(3), Position::new(2, 1));
        assert_eq!(code.obtain_position(5), Position::new(2, 3));
        assert_eq!(code.obtain_position(7), Position::new(3, 1));
    }

    #[test]
    fn columns_count_code_points_not_bytes() {
        let code = Code::from("äö\nü");
        assert_eq!(code.obtain_position(2), Position::new(1, 2));
        assert_eq!(code.obtain_position(5), Position::new(2, 1));
    }

    #[test]
    fn char_boundaries_are_respected() {
        let code = Code::from("aä");
        assert_eq!(code.char_end(0), 1);
        assert_eq!(code.char_end(1), 3);
        assert_eq!(code.char_start(2), 1);
        assert_eq!(code.last_char_range(), 1..3);

        assert_eq!(Code::from("").last_char_range(), 0..0);
    }
}
