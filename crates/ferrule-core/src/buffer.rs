//! Audio buffer abstractions.

use crate::sample::Sample;

/// Borrowed view over the host's channel buffers for one process call.
///
/// Channels are the host's memory, wrapped without copying. Input and output
/// channels may alias when the host processes in place, so plugins must read
/// an input sample before writing the matching output sample.
pub struct AudioBuffer<'a, S: Sample = f32> {
    inputs: &'a [&'a [S]],
    outputs: &'a mut [&'a mut [S]],
    num_samples: usize,
}

impl<'a, S: Sample> AudioBuffer<'a, S> {
    /// Create a new audio buffer.
    ///
    /// Channel slices shorter than `num_samples` are accessed up to their own
    /// length.
    pub fn new(inputs: &'a [&'a [S]], outputs: &'a mut [&'a mut [S]], num_samples: usize) -> Self {
        Self {
            inputs,
            outputs,
            num_samples,
        }
    }

    /// Get the number of samples in this buffer.
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Get the number of input channels.
    #[inline]
    pub fn num_input_channels(&self) -> usize {
        self.inputs.len()
    }

    /// Get the number of output channels.
    #[inline]
    pub fn num_output_channels(&self) -> usize {
        self.outputs.len()
    }

    /// Get an input channel's samples.
    ///
    /// Returns an empty slice if the channel doesn't exist.
    #[inline]
    pub fn input(&self, channel: usize) -> &[S] {
        self.inputs
            .get(channel)
            .map(|c| &c[..self.num_samples.min(c.len())])
            .unwrap_or(&[])
    }

    /// Get a mutable reference to an output channel's samples.
    ///
    /// Returns an empty slice if the channel doesn't exist.
    #[inline]
    pub fn output(&mut self, channel: usize) -> &mut [S] {
        let num_samples = self.num_samples;
        match self.outputs.get_mut(channel) {
            Some(c) => {
                let len = num_samples.min(c.len());
                &mut c[..len]
            }
            None => &mut [],
        }
    }

    /// Iterate over mutable output channel slices.
    #[inline]
    pub fn outputs_mut(&mut self) -> impl Iterator<Item = &mut [S]> + use<'_, 'a, S> {
        let num_samples = self.num_samples;
        self.outputs.iter_mut().map(move |c| {
            let len = num_samples.min(c.len());
            &mut c[..len]
        })
    }

    /// Copy input to output (passthrough).
    ///
    /// Only copies channels that exist in both input and output. Channels
    /// processed in place already hold the input and are left alone.
    pub fn copy_input_to_output(&mut self) {
        let num_channels = self.inputs.len().min(self.outputs.len());
        for ch in 0..num_channels {
            if self.is_in_place(ch) {
                continue;
            }
            let len = self
                .num_samples
                .min(self.inputs[ch].len())
                .min(self.outputs[ch].len());
            let input = &self.inputs[ch][..len];
            self.outputs[ch][..len].copy_from_slice(input);
        }
    }

    /// Whether input and output `channel` share the host's memory.
    #[inline]
    pub fn is_in_place(&self, channel: usize) -> bool {
        match (self.inputs.get(channel), self.outputs.get(channel)) {
            (Some(input), Some(output)) => {
                !input.is_empty() && input.as_ptr() == output.as_ptr()
            }
            _ => false,
        }
    }

    /// Add input to output (accumulating processing).
    pub fn add_input_to_output(&mut self) {
        let num_channels = self.inputs.len().min(self.outputs.len());
        for ch in 0..num_channels {
            let len = self
                .num_samples
                .min(self.inputs[ch].len())
                .min(self.outputs[ch].len());
            for (o, i) in self.outputs[ch][..len].iter_mut().zip(&self.inputs[ch][..len]) {
                *o = *o + *i;
            }
        }
    }

    /// Clear all output channels to silence.
    pub fn clear_outputs(&mut self) {
        for output in self.outputs_mut() {
            output.fill(S::ZERO);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough() {
        let left = [1.0f32, 2.0, 3.0, 4.0];
        let right = [5.0f32, 6.0, 7.0, 8.0];
        let inputs: [&[f32]; 2] = [&left, &right];

        let mut out_left = [0.0f32; 4];
        let mut out_right = [0.0f32; 4];
        let mut outputs: [&mut [f32]; 2] = [&mut out_left, &mut out_right];

        let mut buffer = AudioBuffer::new(&inputs, &mut outputs, 3);
        assert_eq!(buffer.num_samples(), 3);
        assert_eq!(buffer.num_input_channels(), 2);
        assert_eq!(buffer.input(1), &[5.0, 6.0, 7.0]);
        assert!(buffer.input(2).is_empty());

        buffer.copy_input_to_output();
        drop(buffer);

        assert_eq!(out_left, [1.0, 2.0, 3.0, 0.0]);
        assert_eq!(out_right, [5.0, 6.0, 7.0, 0.0]);
    }

    #[test]
    fn test_accumulate_and_clear() {
        let input = [0.5f64; 4];
        let inputs: [&[f64]; 1] = [&input];
        let mut out = [1.0f64; 4];
        let mut outputs: [&mut [f64]; 1] = [&mut out];

        let mut buffer = AudioBuffer::new(&inputs, &mut outputs, 4);
        buffer.add_input_to_output();
        assert_eq!(buffer.output(0), &[1.5, 1.5, 1.5, 1.5]);

        buffer.clear_outputs();
        assert_eq!(buffer.output(0), &[0.0; 4]);
        assert!(buffer.output(3).is_empty());
    }

    #[test]
    fn test_separate_buffers_are_not_in_place() {
        let input = [1.0f32; 4];
        let inputs: [&[f32]; 1] = [&input];
        let mut output = [0.0f32; 4];
        let mut outputs: [&mut [f32]; 1] = [&mut output];

        let buffer = AudioBuffer::new(&inputs, &mut outputs, 4);
        assert!(!buffer.is_in_place(0));
        assert!(!buffer.is_in_place(1));
    }
}
