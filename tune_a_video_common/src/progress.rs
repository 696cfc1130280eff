use indicatif::{ProgressBar, ProgressBarIter, ProgressIterator, ProgressStyle};

/// Wraps an iterator in a progress bar labelled with a message.
///
/// `COLOR` selects the bar color: `b`lue, `g`reen or `r`ed.
pub struct NiceProgressBar<'a, T: ExactSizeIterator, const COLOR: char = 'b'>(pub T, pub &'a str);

impl<T: ExactSizeIterator, const COLOR: char> IntoIterator for NiceProgressBar<'_, T, COLOR> {
    type IntoIter = ProgressBarIter<T>;
    type Item = T::Item;

    fn into_iter(self) -> Self::IntoIter {
        let color = match COLOR {
            'g' => "green",
            'r' => "red",
            _ => "blue",
        };
        let bar = ProgressBar::new(self.0.len() as u64);
        let style = ProgressStyle::default_bar()
            .template(&format!(
                "{}: [{{elapsed_precise}}] [{{bar:40.{color}/{color}}}] {{pos}}/{{len}} ({{eta}})",
                self.1
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("#>-"));
        self.0.progress_with(bar)
    }
}
