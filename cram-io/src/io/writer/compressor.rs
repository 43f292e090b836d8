use std::{collections::HashMap, io};

use crate::{
    container::{
        Slice,
        block::{ContentId, Metrics},
    },
    io::Options,
};

/// Compresses slice data blocks, tracking adaptive encoder selection per content ID.
#[derive(Debug, Default)]
pub(crate) struct BlockCompressor {
    metrics: HashMap<ContentId, Metrics>,
}

impl BlockCompressor {
    /// Compresses the raw, non-empty data blocks of a slice in place.
    ///
    /// Blocks that are already compressed are left as they are.
    pub(crate) fn compress_slice(&mut self, slice: &mut Slice, options: &Options) -> io::Result<()> {
        let primary = options.primary_encoder();

        for block in slice.blocks_mut() {
            if !block.is_raw() || block.data().is_empty() {
                continue;
            }

            let content_id = block.content_id();
            let secondary = options.secondary_encoder(content_id);

            let metrics = self.metrics.entry(content_id).or_insert_with(|| {
                Metrics::new(
                    options.trial_interval,
                    options.trial_count,
                    options.secondary_margin,
                )
            });

            block.compress(primary.as_ref(), secondary.as_ref(), metrics)?;
        }

        Ok(())
    }

    #[cfg(test)]
    fn metrics(&self, content_id: ContentId) -> Option<&Metrics> {
        self.metrics.get(&content_id)
    }
}
