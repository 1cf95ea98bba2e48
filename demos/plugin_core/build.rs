fn main() {
	capreg_build::build();
}
