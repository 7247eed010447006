use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

// curser_pos counts chars, not bytes; getbytepos maps it onto the string.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    curser_pos: usize,
    finished: bool,
    canceled: bool,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct InputResult {
    pub input: String,
    pub finished: bool,
    pub canceled: bool,
    pub curser_pos: usize,
}

impl Inputter {
    pub fn read(&mut self, key: event::KeyEvent) -> InputResult {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, KeyModifiers::NONE) => self.enter(),
            (KeyCode::Esc, KeyModifiers::NONE) => self.escape(),
            (KeyCode::Backspace, KeyModifiers::NONE) => self.backspace(),
            (KeyCode::Delete, KeyModifiers::NONE) => self.delete(),
            (KeyCode::Left, KeyModifiers::NONE) => self.left(),
            (KeyCode::Right, KeyModifiers::NONE) => self.right(),
            (KeyCode::Home, KeyModifiers::NONE) => self.home(),
            (KeyCode::End, KeyModifiers::NONE) => self.end(),
            (kc, km) => self.key(kc, km),
        }
    }

    pub fn set(&mut self, s: &str) {
        self.current_input = s.to_string();
        self.curser_pos = s.chars().count();
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            canceled: self.canceled,
            finished: self.finished,
            input: self.current_input.clone(),
            curser_pos: self.curser_pos,
        }
    }

    pub fn clear(&mut self) {
        self.canceled = false;
        self.finished = false;
        self.current_input.clear();
        self.curser_pos = 0;
    }

    fn enter(&mut self) -> InputResult {
        self.finished = true;
        self.get()
    }

    fn escape(&mut self) -> InputResult {
        self.clear();
        self.canceled = true;
        self.finished = true;
        self.get()
    }

    fn backspace(&mut self) -> InputResult {
        if self.curser_pos > 0 {
            self.curser_pos -= 1;
            self.current_input.remove(self.getbytepos());
        }
        self.get()
    }

    fn delete(&mut self) -> InputResult {
        if self.curser_pos < self.current_input.chars().count() {
            self.current_input.remove(self.getbytepos());
        }
        self.get()
    }

    fn left(&mut self) -> InputResult {
        self.curser_pos = self.curser_pos.saturating_sub(1);
        self.get()
    }

    fn right(&mut self) -> InputResult {
        if self.curser_pos < self.current_input.chars().count() {
            self.curser_pos += 1;
        }
        self.get()
    }

    fn home(&mut self) -> InputResult {
        self.curser_pos = 0;
        self.get()
    }

    fn end(&mut self) -> InputResult {
        self.curser_pos = self.current_input.chars().count();
        self.get()
    }

    fn key(&mut self, code: KeyCode, _modifier: KeyModifiers) -> InputResult {
        if let Some(chr) = code.as_char() {
            self.current_input.insert(self.getbytepos(), chr);
            self.curser_pos += 1;
        }
        self.get()
    }

    fn getbytepos(&self) -> usize {
        self.current_input
            .char_indices()
            .nth(self.curser_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn press(inputter: &mut Inputter, code: KeyCode) -> InputResult {
        inputter.read(event::KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(inputter: &mut Inputter, text: &str) -> InputResult {
        let mut result = inputter.get();
        for c in text.chars() {
            result = press(inputter, KeyCode::Char(c));
        }
        result
    }

    #[test]
    fn typing_appends_at_the_curser() {
        let mut inputter = Inputter::default();
        let result = type_text(&mut inputter, "mig");
        assert_eq!(result.input, "mig");
        assert_eq!(result.curser_pos, 3);
        assert!(!result.finished);
    }

    #[test]
    fn enter_finishes_without_canceling() {
        let mut inputter = Inputter::default();
        type_text(&mut inputter, "mig");
        let result = press(&mut inputter, KeyCode::Enter);
        assert!(result.finished);
        assert!(!result.canceled);
        assert_eq!(result.input, "mig");
    }

    #[test]
    fn escape_cancels_and_clears() {
        let mut inputter = Inputter::default();
        type_text(&mut inputter, "mig");
        let result = press(&mut inputter, KeyCode::Esc);
        assert!(result.finished);
        assert!(result.canceled);
        assert_eq!(result.input, "");
    }

    #[test]
    fn backspace_removes_before_the_curser() {
        let mut inputter = Inputter::default();
        type_text(&mut inputter, "abc");
        press(&mut inputter, KeyCode::Left);
        let result = press(&mut inputter, KeyCode::Backspace);
        assert_eq!(result.input, "ac");
        assert_eq!(result.curser_pos, 1);
    }

    #[test]
    fn delete_removes_under_the_curser() {
        let mut inputter = Inputter::default();
        type_text(&mut inputter, "abc");
        press(&mut inputter, KeyCode::Home);
        let result = press(&mut inputter, KeyCode::Delete);
        assert_eq!(result.input, "bc");
        assert_eq!(result.curser_pos, 0);
    }

    #[test]
    fn multibyte_input_is_edited_on_char_boundaries() {
        let mut inputter = Inputter::default();
        type_text(&mut inputter, "über");
        press(&mut inputter, KeyCode::Home);
        press(&mut inputter, KeyCode::Right);
        let result = press(&mut inputter, KeyCode::Backspace);
        assert_eq!(result.input, "ber");
        assert_eq!(result.curser_pos, 0);
    }

    #[test]
    fn insertion_in_the_middle() {
        let mut inputter = Inputter::default();
        type_text(&mut inputter, "145000");
        press(&mut inputter, KeyCode::Left);
        press(&mut inputter, KeyCode::Left);
        press(&mut inputter, KeyCode::Left);
        let result = press(&mut inputter, KeyCode::Char('x'));
        assert_eq!(result.input, "145x000");
        assert_eq!(result.curser_pos, 4);
    }

    #[test]
    fn set_prefills_with_the_curser_at_the_end() {
        let mut inputter = Inputter::default();
        inputter.set("hariyanv");
        let result = inputter.get();
        assert_eq!(result.input, "hariyanv");
        assert_eq!(result.curser_pos, 8);
    }

    #[test]
    fn clear_resets_a_finished_input() {
        let mut inputter = Inputter::default();
        type_text(&mut inputter, "mig");
        press(&mut inputter, KeyCode::Enter);
        inputter.clear();
        let result = inputter.get();
        assert_eq!(result.input, "");
        assert!(!result.finished);
        assert!(!result.canceled);
        assert_eq!(result.curser_pos, 0);
    }
}
