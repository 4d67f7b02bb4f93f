use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bars for a run: companies processed, product rows written, companies skipped.
///
/// With `tui` off every bar is hidden, so callers never branch on it.
pub struct RunProgress {
    multi: Option<MultiProgress>,
    pub total: ProgressBar,
    pub products: ProgressBar,
    pub skipped: ProgressBar,
}

impl RunProgress {
    pub fn new(len: usize, filings_per_company: usize, tui: bool) -> anyhow::Result<Self> {
        if !tui {
            return Ok(Self {
                multi: None,
                total: ProgressBar::hidden(),
                products: ProgressBar::hidden(),
                skipped: ProgressBar::hidden(),
            });
        }

        // overall multi progress bar
        let multi = MultiProgress::new();

        // total number of companies to process
        let total = multi.add(
            ProgressBar::new(len as u64).with_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.magenta}\n \
                        {msg:>9.white} |{bar:57.white/grey}| {pos:<2} / {human_len} \
                        ({percent_precise}%) [Time: {elapsed}, Rate: {per_sec}, ETA: {eta}]",
                    )?
                    .progress_chars("## "),
            ),
        );
        total.set_message("companies");
        total.enable_steady_tick(Duration::from_millis(100));

        // product rows written, at most one per filing
        let products = multi.insert_after(
            &total,
            ProgressBar::new((len * filings_per_company) as u64).with_style(
                ProgressStyle::default_bar()
                    .template(" {msg:>9.green} |{bar:57.green}| {pos:<2.green}")?
                    .progress_chars("## "),
            ),
        );
        products.set_message("products");

        // companies skipped after a fetch failure
        let skipped = multi.insert_after(
            &products,
            ProgressBar::new(len as u64).with_style(
                ProgressStyle::default_bar()
                    .template(" {msg:>9.red} |{bar:57.red}| {pos:<2.red}")?
                    .progress_chars("## "),
            ),
        );
        skipped.set_message("skipped");

        Ok(Self {
            multi: Some(multi),
            total,
            products,
            skipped,
        })
    }

    /// A spinner line for one in-flight company.
    pub fn spinner(&self, msg: String) -> ProgressBar {
        match &self.multi {
            Some(m) => m.add(
                ProgressBar::new_spinner().with_message(msg).with_style(
                    ProgressStyle::default_spinner()
                        .template("\t   > {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                ),
            ),
            None => ProgressBar::hidden(),
        }
    }

    pub fn finish(&self) {
        self.total.finish_and_clear();
        self.products.finish_and_clear();
        self.skipped.finish_and_clear();
    }
}
