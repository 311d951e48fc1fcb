use anyhow::Context;
use anyhow::Result;
use chol_wishart::stream::SharedStream;
use chol_wishart::CholWishart;
use ndarray::array;

fn main() -> Result<()> {
  let seed = match std::env::args().nth(1) {
    Some(arg) => arg.parse().with_context(|| format!("invalid seed '{arg}'"))?,
    None => 2018,
  };
  let stream = SharedStream::seed_from_u64(seed);
  let scale = array![[4.0, 1.2, -0.6], [1.2, 2.0, 0.3], [-0.6, 0.3, 1.5]];

  let factors = CholWishart::new(3, 5.0, &scale)
    .sample_with(&stream)
    .context("sampling Cholesky factors")?;
  println!("Cholesky factors (seed {seed}):");
  for (j, u) in factors.iter().enumerate() {
    println!("  draw {j}:\n{u:.4}");
  }

  let inverses = CholWishart::new(3, 5.0, &scale)
    .inverse()
    .sample_with(&stream)
    .context("sampling inverse Cholesky factors")?;
  println!("Inverse Cholesky factors:");
  for (j, v) in inverses.iter().enumerate() {
    println!("  draw {j}:\n{v:.4}");
  }

  println!("Variates consumed: {}", stream.draws());
  Ok(())
}
