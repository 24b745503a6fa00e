//! Interactive collaborators for the pipeline's human checkpoints.

use std::path::{Path, PathBuf};

use dialoguer::Input;

use scenesync_core::alignment::{
    parse_index_list, AlignError, AlignResult, CurationGate, SafeFrameSelector,
};
use scenesync_core::models::{CorrespondencePair, FingerprintSet, SafeFrames};

/// Asks for whichever safe frame was not given on the command line.
pub struct PromptSafeFrames {
    pub start: Option<(usize, usize)>,
    pub end: Option<(usize, usize)>,
}

fn stills_folder(set: &FingerprintSet) -> String {
    set.fingerprints
        .iter()
        .find_map(|f| f.image_path.as_deref().and_then(Path::parent))
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(no stills)".to_string())
}

fn ask_still(prompt: String, count: usize) -> AlignResult<usize> {
    Input::<usize>::new()
        .with_prompt(prompt)
        .validate_with(|n: &usize| -> Result<(), String> {
            if (1..=count).contains(n) {
                Ok(())
            } else {
                Err(format!("pick a still between 1 and {}", count))
            }
        })
        .interact_text()
        .map(|n| n - 1)
        .map_err(|e| AlignError::selection(e.to_string()))
}

impl PromptSafeFrames {
    fn ask_pair(
        &self,
        label: &str,
        source: &FingerprintSet,
        target: &FingerprintSet,
    ) -> AlignResult<(usize, usize)> {
        let s = ask_still(
            format!("Source still for the safe {} (1-{})", label, source.len()),
            source.len(),
        )?;
        let t = ask_still(
            format!("Target still for the safe {} (1-{})", label, target.len()),
            target.len(),
        )?;
        Ok((s, t))
    }
}

impl SafeFrameSelector for PromptSafeFrames {
    fn select(&self, source: &FingerprintSet, target: &FingerprintSet) -> AlignResult<SafeFrames> {
        if self.start.is_none() || self.end.is_none() {
            println!();
            println!("Pick one still near the start and one near the end that show the same");
            println!("picture in both videos. Stills are numbered like img00042.jpg -> 42.");
            println!("  source: {} ({} stills)", stills_folder(source), source.len());
            println!("  target: {} ({} stills)", stills_folder(target), target.len());
        }

        let start = match self.start {
            Some(pair) => pair,
            None => self.ask_pair("start", source, target)?,
        };
        let end = match self.end {
            Some(pair) => pair,
            None => self.ask_pair("end", source, target)?,
        };

        Ok(SafeFrames::new(start, end))
    }
}

/// Shows the preview location and asks which associations to drop.
pub struct PromptCuration {
    pub preview: PathBuf,
}

impl CurationGate for PromptCuration {
    fn curate(&self, pairs: &[CorrespondencePair]) -> AlignResult<Vec<usize>> {
        println!();
        println!("{} associations, preview: {}", pairs.len(), self.preview.display());

        let answer = Input::<String>::new()
            .with_prompt("Association indices to remove (e.g. 5,20), empty to keep all")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| AlignError::curation(e.to_string()))?;

        Ok(parse_index_list(&answer))
    }
}
